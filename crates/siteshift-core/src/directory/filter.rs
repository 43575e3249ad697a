//! LDAP search filter construction.
//!
//! The transitive membership predicate is an Active Directory extensible
//! match. Its exact text is what the server keys on, so it lives here and
//! nowhere else.

/// `LDAP_MATCHING_RULE_IN_CHAIN`: walks nested group membership server-side.
pub const LDAP_MATCHING_RULE_IN_CHAIN: &str = "1.2.840.113556.1.4.1941";

/// Groups that belong to `parent_dn`, directly or through nested groups.
pub fn subgroups_filter(parent_dn: &str) -> String {
    format!(
        "(&(objectcategory=group)(memberOf:{}:={}))",
        LDAP_MATCHING_RULE_IN_CHAIN,
        escape_filter_value(parent_dn)
    )
}

/// Person objects named `username` that belong to `group_dn`, directly or
/// through any chain of intermediate groups.
pub fn member_in_chain_filter(group_dn: &str, username: &str) -> String {
    format!(
        "(&(memberOf:{}:={})(sAMAccountName={})(objectcategory=person))",
        LDAP_MATCHING_RULE_IN_CHAIN,
        escape_filter_value(group_dn),
        escape_filter_value(username)
    )
}

/// Escape special characters in filter assertion values (RFC 4515).
pub fn escape_filter_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\5c"),
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\0' => escaped.push_str("\\00"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Append `base_dn` to `group_dn` unless it is already there.
pub fn qualify_dn(group_dn: &str, base_dn: &str) -> String {
    let group = group_dn.trim().trim_end_matches(',');
    let base = base_dn.trim();
    if base.is_empty() || group.to_ascii_lowercase().ends_with(&base.to_ascii_lowercase()) {
        return group.to_string();
    }
    if group.is_empty() {
        return base.to_string();
    }
    format!("{},{}", group, base)
}

/// Value of the leading RDN, e.g. `Finance` for `CN=Finance,OU=Groups`.
pub fn leading_rdn_value(dn: &str) -> Option<&str> {
    let first = dn.split(',').next()?;
    let (_, value) = first.split_once('=')?;
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subgroups_filter() {
        assert_eq!(
            subgroups_filter("CN=MacEnrolment,OU=Mac,DC=example,DC=org"),
            "(&(objectcategory=group)(memberOf:1.2.840.113556.1.4.1941:=CN=MacEnrolment,OU=Mac,DC=example,DC=org))"
        );
    }

    #[test]
    fn test_subgroups_filter_escapes_parent() {
        let filter = subgroups_filter("CN=Mac (Lab),DC=x");
        assert!(filter.ends_with("(memberOf:1.2.840.113556.1.4.1941:=CN=Mac \\28Lab\\29,DC=x))"));
    }

    #[test]
    fn test_member_in_chain_filter() {
        assert_eq!(
            member_in_chain_filter("CN=MacEnrolment-Finance,DC=example,DC=org", "alice"),
            "(&(memberOf:1.2.840.113556.1.4.1941:=CN=MacEnrolment-Finance,DC=example,DC=org)(sAMAccountName=alice)(objectcategory=person))"
        );
    }

    #[test]
    fn test_member_filter_escapes_username() {
        let filter = member_in_chain_filter("CN=G,DC=x", "*)(uid=*");
        assert!(filter.contains("(sAMAccountName=\\2a\\29\\28uid=\\2a)"));
    }

    #[test]
    fn test_escape_filter_value() {
        assert_eq!(escape_filter_value("plain"), "plain");
        assert_eq!(escape_filter_value("a\\b"), "a\\5cb");
        assert_eq!(escape_filter_value("Mac (Lab)"), "Mac \\28Lab\\29");
    }

    #[test]
    fn test_qualify_dn_appends_base() {
        assert_eq!(
            qualify_dn("CN=MacEnrolment,OU=Mac", "DC=example,DC=org"),
            "CN=MacEnrolment,OU=Mac,DC=example,DC=org"
        );
    }

    #[test]
    fn test_qualify_dn_keeps_already_qualified() {
        assert_eq!(
            qualify_dn("CN=MacEnrolment,DC=Example,DC=org", "DC=example,DC=org"),
            "CN=MacEnrolment,DC=Example,DC=org"
        );
    }

    #[test]
    fn test_leading_rdn_value() {
        assert_eq!(leading_rdn_value("CN=Finance,OU=G,DC=x"), Some("Finance"));
        assert_eq!(leading_rdn_value("garbage"), None);
    }
}
