use adjpos_types::{Group, Position, Token};

/// Placeholder surfaces transcribers use for ellipsis or overlap; the tagger
/// sometimes calls them nouns.
pub const SENTINEL_NOUNS: &[&str] = &["-", "_", "<", ">"];

/// Prenominal and postnominal groups of one token sequence.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Groups {
    pub prenominal: Vec<Group>,
    pub postnominal: Vec<Group>,
}

impl Groups {
    pub fn is_empty(&self) -> bool {
        self.prenominal.is_empty() && self.postnominal.is_empty()
    }

    pub fn at(&self, position: Position) -> &[Group] {
        match position {
            Position::Prenominal => &self.prenominal,
            Position::Postnominal => &self.postnominal,
        }
    }
}

/// Pair every noun with the adjectives directly adjacent to it.
///
/// Runs are strict: scanning stops at the first token that is not `ADJ`.
/// Postnominal runs keep surface order; prenominal runs are nearest-first.
/// An adjective between two nouns belongs to both.
pub fn find_groups(tokens: &[Token]) -> Groups {
    let mut groups = Groups::default();

    for (idx, token) in tokens.iter().enumerate() {
        if !token.is_noun() || SENTINEL_NOUNS.contains(&token.surface.as_str()) {
            continue;
        }

        let after = tokens[idx + 1..]
            .iter()
            .take_while(|t| t.is_adj())
            .map(|t| t.surface.clone());
        if let Some(group) = Group::new(token.surface.clone(), after) {
            groups.postnominal.push(group);
        }

        let before = tokens[..idx]
            .iter()
            .rev()
            .take_while(|t| t.is_adj())
            .map(|t| t.surface.clone());
        if let Some(group) = Group::new(token.surface.clone(), before) {
            groups.prenominal.push(group);
        }
    }

    groups
}
