//! Shared enumerations and field bundles.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Effort estimate attached to every todo-like record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Hardness {
    Easy,
    Normal,
    Hard,
    Extraordinary,
}

/// How daunting a todo feels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Scariness {
    Low,
    Medium,
    High,
    Extreme,
}

impl Hardness {
    /// Storage representation.
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Normal => "normal",
            Self::Hard => "hard",
            Self::Extraordinary => "extraordinary",
        }
    }

    /// Parses the storage representation.
    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "easy" => Some(Self::Easy),
            "normal" => Some(Self::Normal),
            "hard" => Some(Self::Hard),
            "extraordinary" => Some(Self::Extraordinary),
            _ => None,
        }
    }
}

impl Scariness {
    /// Storage representation.
    pub fn as_db_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Extreme => "extreme",
        }
    }

    /// Parses the storage representation.
    pub fn from_db_str(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            "extreme" => Some(Self::Extreme),
            _ => None,
        }
    }
}

/// Mutable attributes shared by every todo-like record.
///
/// Used as the input shape for create and full-overwrite update operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    pub name: String,
    pub scariness: Scariness,
    pub hardness: Hardness,
}

impl TodoDraft {
    pub fn new(name: impl Into<String>, scariness: Scariness, hardness: Hardness) -> Self {
        Self {
            name: name.into(),
            scariness,
            hardness,
        }
    }
}

/// Entity kinds, used to label not-found and cascade failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Day,
    DayTodo,
    Routine,
    RoutineTodo,
    RoutineInstance,
    RoutineTodoInstance,
    TodoBlock,
    Todo,
}

impl EntityKind {
    /// Stable snake_case label used in log events and error bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::DayTodo => "day_todo",
            Self::Routine => "routine",
            Self::RoutineTodo => "routine_todo",
            Self::RoutineInstance => "routine_instance",
            Self::RoutineTodoInstance => "routine_todo_instance",
            Self::TodoBlock => "todo_block",
            Self::Todo => "todo",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Day => "day",
            Self::DayTodo => "day todo",
            Self::Routine => "routine",
            Self::RoutineTodo => "routine todo",
            Self::RoutineInstance => "routine instance",
            Self::RoutineTodoInstance => "routine todo instance",
            Self::TodoBlock => "todo block",
            Self::Todo => "todo",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::{Hardness, Scariness};

    #[test]
    fn db_codecs_accept_only_known_values() {
        for hardness in [
            Hardness::Easy,
            Hardness::Normal,
            Hardness::Hard,
            Hardness::Extraordinary,
        ] {
            assert_eq!(Hardness::from_db_str(hardness.as_db_str()), Some(hardness));
        }
        assert_eq!(Scariness::from_db_str("LOW"), None);
        assert_eq!(Hardness::from_db_str(""), None);
    }

    #[test]
    fn wire_names_are_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&Hardness::Extraordinary).unwrap(),
            "\"EXTRAORDINARY\""
        );
        let parsed: Scariness = serde_json::from_str("\"LOW\"").unwrap();
        assert_eq!(parsed, Scariness::Low);
    }
}
