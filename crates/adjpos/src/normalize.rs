use std::sync::Arc;

use adjpos_morph::{LemmaError, LemmaOverrides, Lemmatizer};
use adjpos_types::{Adjective, Group, Pos};

/// Attaches lemmas to groups: overrides first, then the lemmatizer.
#[derive(Clone)]
pub struct LemmaNormalizer {
    overrides: LemmaOverrides,
    lemmatizer: Arc<dyn Lemmatizer>,
}

impl LemmaNormalizer {
    pub fn new(overrides: LemmaOverrides, lemmatizer: Arc<dyn Lemmatizer>) -> Self {
        Self {
            overrides,
            lemmatizer,
        }
    }

    pub fn overrides(&self) -> &LemmaOverrides {
        &self.overrides
    }

    /// Lemmatize every adjective and the noun of a group.
    ///
    /// An override may also replace the stored adjective surface. Lemmas
    /// already present are recomputed from the stored surfaces.
    pub fn normalize_group(&self, group: &Group) -> Result<Group, LemmaError> {
        let adjectives = group
            .adjectives()
            .iter()
            .map(|adj| self.normalize_adjective(&adj.surface))
            .collect::<Result<Vec<_>, _>>()?;
        let noun_lemma = self.lemmatizer.lemmatize(group.noun(), Pos::Noun)?;
        Group::with_lemmas(group.noun(), Some(noun_lemma), adjectives).ok_or(LemmaError::Empty)
    }

    fn normalize_adjective(&self, surface: &str) -> Result<Adjective, LemmaError> {
        if let Some(entry) = self.overrides.get(surface) {
            let surface = entry.surface.as_deref().unwrap_or(surface);
            return Ok(Adjective::with_lemma(surface, entry.lemma.clone()));
        }
        let lemma = self.lemmatizer.lemmatize(surface, Pos::Adj)?;
        Ok(Adjective::with_lemma(surface, lemma))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    /// Lemmatizer backed by a fixed table; unknown words map to themselves.
    struct TableLemmatizer(HashMap<(&'static str, Pos), &'static str>);

    impl Lemmatizer for TableLemmatizer {
        fn lemmatize(&self, word: &str, pos: Pos) -> Result<String, LemmaError> {
            if word == "boom" {
                return Err(LemmaError::Failed {
                    word: word.into(),
                    pos,
                    reason: "test failure".into(),
                });
            }
            Ok(self
                .0
                .iter()
                .find(|((w, p), _)| *w == word && *p == pos)
                .map(|(_, lemma)| lemma.to_string())
                .unwrap_or_else(|| word.to_lowercase()))
        }
    }

    fn normalizer() -> LemmaNormalizer {
        let table = HashMap::from([
            (("chats", Pos::Noun), "chat"),
            (("noirs", Pos::Adj), "noir"),
            (("tits", Pos::Adj), "tit"),
        ]);
        LemmaNormalizer::new(LemmaOverrides::builtin(), Arc::new(TableLemmatizer(table)))
    }

    #[test]
    fn lemmatizes_noun_and_adjectives() {
        let group = Group::new("chats", ["noirs"]).unwrap();
        let normalized = normalizer().normalize_group(&group).unwrap();
        assert!(normalized.is_normalized());
        assert_eq!(normalized.noun_lemma(), Some("chat"));
        assert_eq!(normalized.adjective_lemmas().collect::<Vec<_>>(), vec!["noir"]);
    }

    #[test]
    fn overrides_win_over_the_lemmatizer() {
        let group = Group::new("chats", ["Tits", "deu"]).unwrap();
        let normalized = normalizer().normalize_group(&group).unwrap();
        let adjectives = normalized.adjectives();
        assert_eq!(adjectives[0], Adjective::with_lemma("Tits", "petit"));
        assert_eq!(adjectives[1], Adjective::with_lemma("deux", "deux"));
    }

    #[test]
    fn renormalizing_is_stable() {
        let normalizer = normalizer();
        let group = Group::new("chats", ["noirs", "deu"]).unwrap();
        let once = normalizer.normalize_group(&group).unwrap();
        let twice = normalizer.normalize_group(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn lemmatizer_errors_propagate() {
        let group = Group::new("chats", ["boom"]).unwrap();
        assert!(matches!(
            normalizer().normalize_group(&group),
            Err(LemmaError::Failed { .. })
        ));
    }
}
