//! Who may use which color, and who may run admin commands.

use crate::colors::NameColor;

/// Grants every color and the admin subcommands.
pub const ADMIN: &str = "namecolor.admin";
/// Grants every color.
pub const COLOR_ALL: &str = "namecolor.color.all";
/// Grants every color except black.
pub const COLOR_NO_BLACK: &str = "namecolor.color.noblack";
/// Prefix of the per-color nodes, e.g. `namecolor.color.red`.
pub const COLOR_PREFIX: &str = "namecolor.color.";

/// Anything that can be asked about operator status and permission nodes.
pub trait Permissible {
    fn is_op(&self) -> bool;
    fn has_permission(&self, node: &str) -> bool;
}

/// Ops and holders of [`ADMIN`] may change other players' colors.
pub fn is_admin(subject: &dyn Permissible) -> bool {
    subject.is_op() || subject.has_permission(ADMIN)
}

/// Only ops may reload the plugin.
pub fn can_reload(subject: &dyn Permissible) -> bool {
    subject.is_op()
}

/// Whether `subject` may pick `color` for their own name.
pub fn can_use_color(subject: &dyn Permissible, color: NameColor) -> bool {
    if is_admin(subject) || subject.has_permission(COLOR_ALL) {
        return true;
    }
    if color != NameColor::Black && subject.has_permission(COLOR_NO_BLACK) {
        return true;
    }
    subject.has_permission(&color_node(color))
}

/// The per-color permission node for `color`.
pub fn color_node(color: NameColor) -> String {
    format!("{COLOR_PREFIX}{}", color.name())
}

/// Every color `subject` may use, in code order.
pub fn available_colors(subject: &dyn Permissible) -> Vec<NameColor> {
    NameColor::ALL
        .into_iter()
        .filter(|c| can_use_color(subject, *c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    struct Subject {
        op: bool,
        nodes: HashSet<&'static str>,
    }

    impl Subject {
        fn with(nodes: &[&'static str]) -> Self {
            Self {
                op: false,
                nodes: nodes.iter().copied().collect(),
            }
        }
    }

    impl Permissible for Subject {
        fn is_op(&self) -> bool {
            self.op
        }

        fn has_permission(&self, node: &str) -> bool {
            self.nodes.contains(node)
        }
    }

    #[test]
    fn test_op_gets_everything() {
        let op = Subject {
            op: true,
            nodes: HashSet::new(),
        };
        assert!(is_admin(&op));
        assert!(can_reload(&op));
        assert_eq!(available_colors(&op).len(), 16);
    }

    #[test]
    fn test_admin_node_is_not_reload() {
        let admin = Subject::with(&[ADMIN]);
        assert!(is_admin(&admin));
        assert!(!can_reload(&admin));
        assert!(can_use_color(&admin, NameColor::Black));
    }

    #[test]
    fn test_noblack_excludes_only_black() {
        let subject = Subject::with(&[COLOR_NO_BLACK]);
        let colors = available_colors(&subject);
        assert_eq!(colors.len(), 15);
        assert!(!colors.contains(&NameColor::Black));
    }

    #[test]
    fn test_individual_nodes() {
        let subject = Subject::with(&["namecolor.color.red", "namecolor.color.gold"]);
        assert_eq!(
            available_colors(&subject),
            vec![NameColor::Gold, NameColor::Red]
        );
        assert!(!is_admin(&subject));
    }

    #[test]
    fn test_nobody_gets_nothing() {
        assert!(available_colors(&Subject::with(&[])).is_empty());
    }
}
