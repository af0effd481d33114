// Two record kinds, two policies. Identities refuse to regress a good
// value; group metadata prefers whatever non-empty value arrived last.
// They are kept apart on purpose: their observable behaviour differs.

use crate::classifier::{is_empty, is_placeholder_name};
use crate::group::GroupMetadata;
use crate::identity::Identity;

/// Reconciles a stored value with a freshly received one.
///
/// Implementations are pure: same inputs, same output, no side effects.
pub trait MergeStrategy<V> {
    fn merge(current: Option<&V>, incoming: &V) -> V;

    /// Folds a sequence of updates, oldest first, starting from nothing.
    fn merge_all<'a, I>(values: I) -> Option<V>
    where
        I: IntoIterator<Item = &'a V>,
        V: 'a,
    {
        values
            .into_iter()
            .fold(None, |acc, val| Some(Self::merge(acc.as_ref(), val)))
    }
}

/// Sticky-unless-upgrade policy for [`Identity`].
pub struct IdentityMergeStrategy;

impl MergeStrategy<Identity> for IdentityMergeStrategy {
    fn merge(current: Option<&Identity>, incoming: &Identity) -> Identity {
        let mut next = current.cloned().unwrap_or_default();

        let incoming_name = incoming.name.as_deref();
        if !is_placeholder_name(incoming_name) {
            let current_name = next.name.as_deref();
            if is_empty(current_name) || is_placeholder_name(current_name) {
                next.name = incoming.name.clone();
            }
        }

        let incoming_avatar = incoming.avatar.as_deref();
        if !is_empty(incoming_avatar) {
            let current_avatar = next.avatar.as_deref();
            if is_empty(current_avatar)
                || current_avatar.is_some_and(|a| a.contains("default"))
            {
                next.avatar = incoming.avatar.clone();
            }
        }

        // Incoming is the base layer; anything already on the working
        // record stays on top.
        let mut extra = incoming.extra.clone();
        extra.extend(next.extra);

        Identity {
            name: next.name.or_else(|| incoming.name.clone()),
            avatar: next.avatar.or_else(|| incoming.avatar.clone()),
            extra,
        }
    }
}

/// Prefer-fresh-non-empty policy for [`GroupMetadata`].
pub struct GroupMergeStrategy;

fn fresh(prev: &Option<String>, incoming: &Option<String>) -> Option<String> {
    match incoming {
        Some(v) if !v.trim().is_empty() => Some(v.clone()),
        _ => prev.clone(),
    }
}

impl MergeStrategy<GroupMetadata> for GroupMergeStrategy {
    fn merge(
        prev: Option<&GroupMetadata>,
        incoming: &GroupMetadata,
    ) -> GroupMetadata {
        let base = prev.cloned().unwrap_or_default();

        let participants = match prev {
            Some(_) if incoming.participants.is_empty() => base.participants,
            _ => incoming.participants.clone(),
        };

        GroupMetadata {
            subject: fresh(&base.subject, &incoming.subject),
            description: fresh(&base.description, &incoming.description),
            created_at: fresh(&base.created_at, &incoming.created_at),
            owner: fresh(&base.owner, &incoming.owner),
            members_count: incoming.members_count.or(base.members_count),
            status: fresh(&base.status, &incoming.status),
            participants,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group::Participant;
    use rstest::rstest;
    use serde_json::json;

    #[test]
    fn good_name_and_avatar_survive_placeholder_update() {
        let current = Identity::named("João").with_avatar("a.png");
        let incoming = Identity::new(Some("Operador".to_owned()), None);

        let merged = IdentityMergeStrategy::merge(Some(&current), &incoming);
        assert_eq!(merged.name.as_deref(), Some("João"));
        assert_eq!(merged.avatar.as_deref(), Some("a.png"));
    }

    #[test]
    fn placeholder_is_upgraded() {
        let current = Identity::named("Operador");
        let merged = IdentityMergeStrategy::merge(
            Some(&current),
            &Identity::named("João"),
        );
        assert_eq!(merged.name.as_deref(), Some("João"));
    }

    #[test]
    fn placeholder_is_used_when_nothing_is_known() {
        let merged =
            IdentityMergeStrategy::merge(None, &Identity::named("Operador"));
        assert_eq!(merged.name.as_deref(), Some("Operador"));
    }

    #[test]
    fn good_name_is_never_replaced_by_another_good_name() {
        let merged = IdentityMergeStrategy::merge(
            Some(&Identity::named("João")),
            &Identity::named("Joãozinho"),
        );
        assert_eq!(merged.name.as_deref(), Some("João"));
    }

    #[test]
    fn extra_fields_are_sticky_once_set() {
        let current = Identity::named("João").with_extra("tag", json!("X"));
        let incoming = Identity::named("João")
            .with_extra("tag", json!("Y"))
            .with_extra("source", json!("crm"));

        let merged = IdentityMergeStrategy::merge(Some(&current), &incoming);
        assert_eq!(merged.extra.get("tag"), Some(&json!("X")));
        assert_eq!(merged.extra.get("source"), Some(&json!("crm")));
    }

    #[rstest]
    #[case(None, Some("new.png"), Some("new.png"))]
    #[case(Some("default-avatar.png"), Some("new.png"), Some("new.png"))]
    #[case(Some("old.png"), Some("new.png"), Some("old.png"))]
    #[case(Some("old.png"), None, Some("old.png"))]
    #[case(Some("old.png"), Some("undefined"), Some("old.png"))]
    #[case(Some(""), Some("new.png"), Some("new.png"))]
    fn avatar_upgrades_only_from_empty_or_default(
        #[case] current: Option<&str>,
        #[case] incoming: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let current = Identity::new(None, current.map(str::to_owned));
        let incoming = Identity::new(None, incoming.map(str::to_owned));

        let merged = IdentityMergeStrategy::merge(Some(&current), &incoming);
        assert_eq!(merged.avatar.as_deref(), expected);
    }

    #[test]
    fn identity_merge_is_idempotent() {
        let current = Identity::named("Operador");
        let incoming = Identity::named("João").with_avatar("a.png");

        let once = IdentityMergeStrategy::merge(Some(&current), &incoming);
        let twice = IdentityMergeStrategy::merge(Some(&once), &incoming);
        assert_eq!(once, twice);
    }

    #[test]
    fn merge_all_folds_oldest_first() {
        let updates = [
            Identity::named("Operador"),
            Identity::named("Maria"),
            Identity::named("Atendente").with_avatar("m.png"),
        ];

        let merged = IdentityMergeStrategy::merge_all(&updates).unwrap();
        assert_eq!(merged.name.as_deref(), Some("Maria"));
        assert_eq!(merged.avatar.as_deref(), Some("m.png"));
        assert!(IdentityMergeStrategy::merge_all(std::iter::empty()).is_none());
    }

    fn group(subject: Option<&str>, participants: &[&str]) -> GroupMetadata {
        GroupMetadata {
            subject: subject.map(str::to_owned),
            participants: participants
                .iter()
                .map(|jid| Participant::new(jid))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn group_scalars_prefer_fresh_values() {
        let prev = group(Some("Old"), &["a@s.whatsapp.net"]);
        let incoming = group(Some("New"), &[]);

        let merged = GroupMergeStrategy::merge(Some(&prev), &incoming);
        assert_eq!(merged.subject.as_deref(), Some("New"));
        assert_eq!(merged.participants, prev.participants);
    }

    #[test]
    fn group_blank_scalars_keep_previous() {
        let mut prev = group(Some("Old"), &[]);
        prev.members_count = Some(4);
        prev.status = Some("active".to_owned());
        let mut incoming = group(Some("  "), &[]);
        incoming.status = None;

        let merged = GroupMergeStrategy::merge(Some(&prev), &incoming);
        assert_eq!(merged.subject.as_deref(), Some("Old"));
        assert_eq!(merged.members_count, Some(4));
        assert_eq!(merged.status.as_deref(), Some("active"));
    }

    #[test]
    fn group_scalar_replaces_even_good_previous_value() {
        let mut prev = group(Some("Vendas"), &[]);
        prev.members_count = Some(10);
        let mut incoming = group(Some("Grupo"), &[]);
        incoming.members_count = Some(0);

        let merged = GroupMergeStrategy::merge(Some(&prev), &incoming);
        assert_eq!(merged.subject.as_deref(), Some("Grupo"));
        assert_eq!(merged.members_count, Some(0));
    }

    #[test]
    fn group_participants_replaced_when_non_empty() {
        let prev = group(None, &["a@s.whatsapp.net"]);
        let incoming = group(None, &["b@s.whatsapp.net", "c@s.whatsapp.net"]);

        let merged = GroupMergeStrategy::merge(Some(&prev), &incoming);
        assert_eq!(merged.participant_jids(), incoming.participant_jids());
    }

    #[test]
    fn group_without_previous_takes_incoming() {
        let merged = GroupMergeStrategy::merge(None, &group(None, &[]));
        assert_eq!(merged, GroupMetadata::default());
    }
}
