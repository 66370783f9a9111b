//! Filter and sort options for todo listings.

use clap::ValueEnum;

use crate::todo::Todo;

/// Status filter applied to listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusFilter {
    /// Every todo.
    All,
    /// Not yet completed.
    Active,
    /// Completed only.
    Completed,
}

impl StatusFilter {
    /// Pure predicate deciding whether a todo passes the filter.
    pub fn matches(self, todo: &Todo) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => !todo.completed,
            StatusFilter::Completed => todo.completed,
        }
    }

    /// Cycle to the next filter (bound to Tab in the TUI).
    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Active,
            StatusFilter::Active => StatusFilter::Completed,
            StatusFilter::Completed => StatusFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
        }
    }
}

/// Available sorting options for todo lists.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortKey {
    Id,
    Updated,
    Created,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todo(completed: bool) -> Todo {
        Todo {
            id: 1,
            text: "x".into(),
            completed,
            references: Vec::new(),
            created_at_utc: 0,
            updated_at_utc: 0,
        }
    }

    #[test]
    fn test_status_filter_predicates() {
        assert!(StatusFilter::All.matches(&todo(false)));
        assert!(StatusFilter::All.matches(&todo(true)));
        assert!(StatusFilter::Active.matches(&todo(false)));
        assert!(!StatusFilter::Active.matches(&todo(true)));
        assert!(StatusFilter::Completed.matches(&todo(true)));
        assert!(!StatusFilter::Completed.matches(&todo(false)));
    }

    #[test]
    fn test_status_filter_cycle() {
        assert_eq!(StatusFilter::All.next(), StatusFilter::Active);
        assert_eq!(StatusFilter::Active.next(), StatusFilter::Completed);
        assert_eq!(StatusFilter::Completed.next(), StatusFilter::All);
    }
}
