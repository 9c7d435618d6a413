//! Default profile pictures. The image itself lives on an external CDN; all
//! we store is the generated URL, seeded from the username so every user
//! gets a stable, distinct avatar.

const DICEBEAR_BASE: &str = "https://api.dicebear.com/7.x";
const STYLE: &str = "avataaars";

pub fn default_avatar_url(username: &str) -> String {
    let seed: String = username
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();
    let seed = if seed.is_empty() { "user" } else { &seed };

    format!("{DICEBEAR_BASE}/{STYLE}/png?seed={seed}&size=200")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_url_with_sanitized_username() {
        assert_eq!(
            default_avatar_url("alice"),
            "https://api.dicebear.com/7.x/avataaars/png?seed=alice&size=200"
        );
        assert!(default_avatar_url("mr. bond 007").contains("seed=mrbond007"));
        assert!(default_avatar_url("???").contains("seed=user"));
    }
}
