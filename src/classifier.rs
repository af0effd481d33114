use once_cell::sync::Lazy;
use regex::Regex;

use crate::jid::jid_to_pretty;

/// Generic labels assigned by the messaging backend or by operators.
/// They carry no identifying information.
pub const PLACEHOLDER_NAMES: [&str; 8] = [
    "Operador",
    "Atendente",
    "Você",
    "Voce",
    "Você - IA",
    "IA",
    "Grupo",
    "Group",
];

// "Grupo ********"
static MASKED_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Grupo\s+\*+$").expect("valid pattern"));

pub fn is_empty(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => v.trim().is_empty() || v == "undefined" || v == "null",
    }
}

pub fn is_placeholder_name(name: Option<&str>) -> bool {
    let name = match name {
        Some(n) if !is_empty(Some(n)) => n.trim(),
        _ => return true,
    };
    PLACEHOLDER_NAMES.contains(&name) || MASKED_GROUP.is_match(name)
}

/// Raw name sources for one chat participant, in no particular order.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameCandidates<'a> {
    pub group_name: Option<&'a str>,
    pub contact_name: Option<&'a str>,
    pub push_name: Option<&'a str>,
    pub notify: Option<&'a str>,
    pub jid: Option<&'a str>,
}

/// Picks the first informative label, in order: group name, contact name,
/// push name, notify name, pretty JID. Falls back to the pretty JID,
/// which may be empty.
pub fn resolve_display_name(src: NameCandidates<'_>) -> String {
    let pretty = src.jid.map(jid_to_pretty).unwrap_or_default();

    [
        src.group_name,
        src.contact_name,
        src.push_name,
        src.notify,
        Some(pretty),
    ]
    .into_iter()
    .flatten()
    .filter(|n| !n.is_empty())
    .find(|n| !is_placeholder_name(Some(*n)))
    .unwrap_or(pretty)
    .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, true)]
    #[case(Some(""), true)]
    #[case(Some("   "), true)]
    #[case(Some("undefined"), true)]
    #[case(Some("null"), true)]
    #[case(Some("João"), false)]
    #[case(Some(" nullable "), false)]
    fn empty_values(#[case] value: Option<&str>, #[case] expected: bool) {
        assert_eq!(is_empty(value), expected);
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(""), true)]
    #[case(Some("Operador"), true)]
    #[case(Some("  Atendente "), true)]
    #[case(Some("Você"), true)]
    #[case(Some("Voce"), true)]
    #[case(Some("Você - IA"), true)]
    #[case(Some("IA"), true)]
    #[case(Some("Grupo"), true)]
    #[case(Some("Group"), true)]
    #[case(Some("Grupo ********"), true)]
    #[case(Some("Grupo\t**"), true)]
    #[case(Some("Grupo Família"), false)]
    #[case(Some("Grupo **x"), false)]
    #[case(Some("Grupo**"), false)]
    #[case(Some("operador"), false)]
    #[case(Some("João"), false)]
    fn placeholder_names(#[case] name: Option<&str>, #[case] expected: bool) {
        assert_eq!(is_placeholder_name(name), expected);
    }

    #[test]
    fn display_name_prefers_first_informative_candidate() {
        let name = resolve_display_name(NameCandidates {
            group_name: Some("Grupo"),
            contact_name: Some("Operador"),
            push_name: Some("Maria"),
            notify: Some("Mari"),
            jid: Some("5547@s.whatsapp.net"),
        });
        assert_eq!(name, "Maria");
    }

    #[test]
    fn display_name_falls_back_to_pretty_jid() {
        let name = resolve_display_name(NameCandidates {
            contact_name: Some("Atendente"),
            jid: Some("5547@s.whatsapp.net"),
            ..Default::default()
        });
        assert_eq!(name, "5547");
    }

    #[test]
    fn display_name_without_anything_is_empty() {
        assert_eq!(resolve_display_name(NameCandidates::default()), "");
    }

    #[test]
    fn display_name_keeps_candidate_untrimmed() {
        let name = resolve_display_name(NameCandidates {
            contact_name: Some(" João "),
            ..Default::default()
        });
        assert_eq!(name, " João ");
    }
}
