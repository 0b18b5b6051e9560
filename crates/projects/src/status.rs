use core::str::FromStr;

use serde::{Deserialize, Serialize};

use wrapquote_core::DomainError;

/// Project status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Draft,
    Sent,
    Approved,
    Rejected,
}

impl ProjectStatus {
    pub const ALL: [ProjectStatus; 4] = [
        ProjectStatus::Draft,
        ProjectStatus::Sent,
        ProjectStatus::Approved,
        ProjectStatus::Rejected,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProjectStatus::Draft => "draft",
            ProjectStatus::Sent => "sent",
            ProjectStatus::Approved => "approved",
            ProjectStatus::Rejected => "rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, ProjectStatus::Approved | ProjectStatus::Rejected)
    }

    /// Forward edges of the workflow. Same-state requests are handled by the
    /// caller as no-ops and are not edges.
    pub fn can_transition_to(self, target: ProjectStatus) -> bool {
        use ProjectStatus::*;
        matches!(
            (self, target),
            (Draft, Sent) | (Sent, Approved) | (Sent, Rejected)
        )
    }
}

impl core::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProjectStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProjectStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| DomainError::invalid_input("status", format!("unknown status `{s}`")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_three_forward_edges_exist() {
        let mut edges = Vec::new();
        for from in ProjectStatus::ALL {
            for to in ProjectStatus::ALL {
                if from.can_transition_to(to) {
                    edges.push((from, to));
                }
            }
        }
        assert_eq!(
            edges,
            vec![
                (ProjectStatus::Draft, ProjectStatus::Sent),
                (ProjectStatus::Sent, ProjectStatus::Approved),
                (ProjectStatus::Sent, ProjectStatus::Rejected),
            ]
        );
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for status in [ProjectStatus::Approved, ProjectStatus::Rejected] {
            assert!(status.is_terminal());
            assert!(ProjectStatus::ALL.iter().all(|to| !status.can_transition_to(*to)));
        }
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Sent".parse::<ProjectStatus>().unwrap(), ProjectStatus::Sent);
        assert!("archived".parse::<ProjectStatus>().is_err());
    }
}
