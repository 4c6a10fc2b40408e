//! MixedCaps identifier handling.

/// Derives the GraphQL field name for a MixedCaps declared name:
/// `DatabaseID` becomes `databaseId`, `URL` becomes `url`, `AvatarURL`
/// becomes `avatarUrl`.
pub(crate) fn lower_camel_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for (i, word) in split_mixed_caps(name).iter().enumerate() {
        let mut chars = word.chars();
        if i == 0 {
            out.extend(word.chars().flat_map(char::to_lowercase));
        } else if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars.flat_map(char::to_lowercase));
        }
    }
    out
}

/// Splits a MixedCaps name into words.
///
/// Word boundaries sit at lower→Upper transitions and at Upper→Upper,lower
/// transitions (the end of an uppercase run followed by a regular word), so a
/// trailing acronym is its own word. The plural `IDs` run stays whole.
fn split_mixed_caps(name: &str) -> Vec<String> {
    let runes: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let (mut w, mut i) = (0, 0);
    while i < runes.len() {
        let mut eow = false;
        if i + 1 == runes.len() {
            eow = true;
        } else if runes[i].is_lowercase() && runes[i + 1].is_uppercase() {
            eow = true;
        } else if i + 2 < runes.len()
            && runes[i].is_uppercase()
            && runes[i + 1].is_uppercase()
            && runes[i + 2].is_lowercase()
        {
            eow = runes[i..i + 3] != ['I', 'D', 's'];
        }
        i += 1;
        if eow {
            words.push(runes[w..i].iter().collect());
            w = i;
        }
    }
    words
}

#[cfg(test)]
mod tests {
    use super::lower_camel_case;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_words() {
        assert_eq!(lower_camel_case("Login"), "login");
        assert_eq!(lower_camel_case("CreatedAt"), "createdAt");
        assert_eq!(lower_camel_case("ViewerCanUpdate"), "viewerCanUpdate");
        assert_eq!(lower_camel_case("HasNextPage"), "hasNextPage");
    }

    #[test]
    fn trailing_acronyms() {
        assert_eq!(lower_camel_case("ID"), "id");
        assert_eq!(lower_camel_case("DatabaseID"), "databaseId");
        assert_eq!(lower_camel_case("URL"), "url");
        assert_eq!(lower_camel_case("AvatarURL"), "avatarUrl");
    }

    #[test]
    fn leading_acronyms() {
        assert_eq!(lower_camel_case("URLPath"), "urlPath");
        assert_eq!(lower_camel_case("IDToken"), "idToken");
    }

    #[test]
    fn plural_id_run() {
        assert_eq!(lower_camel_case("IDs"), "ids");
        assert_eq!(lower_camel_case("UserIDs"), "userIds");
    }

    #[test]
    fn already_lower() {
        assert_eq!(lower_camel_case("login"), "login");
        assert_eq!(lower_camel_case("endCursor"), "endCursor");
    }
}
