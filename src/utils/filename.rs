use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::UnicodeNormalization;

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_.\-]").expect("valid filename regex"))
}

/// Turn a client-supplied filename into a key that is safe to store.
///
/// `/` becomes a word break, whitespace runs collapse to `_`, non-ASCII
/// characters are decomposed (`ü` becomes `u`) or dropped, and anything
/// outside `[A-Za-z0-9_.-]` is removed, backslashes included. Leading and
/// trailing dots and underscores are stripped, so `../../etc/passwd`
/// becomes `etc_passwd`. The result may be empty.
pub fn secure_filename(filename: &str) -> String {
    let ascii: String = filename.nfkd().filter(char::is_ascii).collect();
    let separated = ascii.replace('/', " ");
    let joined = separated.split_whitespace().collect::<Vec<_>>().join("_");
    let cleaned = unsafe_chars().replace_all(&joined, "");

    cleaned.trim_matches(|c| c == '.' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_traversal_is_flattened() {
        assert_eq!(secure_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(secure_filename("/var/www/index.html"), "var_www_index.html");
        assert_eq!(secure_filename("C:\\Windows\\evil.exe"), "CWindowsevil.exe");
        assert_eq!(secure_filename("..\\..\\boot.ini"), "boot.ini");
    }

    #[test]
    fn test_whitespace_collapses_to_underscores() {
        assert_eq!(secure_filename("My cool movie.mov"), "My_cool_movie.mov");
        assert_eq!(secure_filename("  spaced \t out  .png"), "spaced_out_.png");
    }

    #[test]
    fn test_non_ascii_is_decomposed_or_dropped() {
        assert_eq!(secure_filename("München.png"), "Munchen.png");
        assert_eq!(secure_filename("i contain cool ümläuts.txt"), "i_contain_cool_umlauts.txt");
        assert_eq!(secure_filename("日本語.jpg"), "jpg");
    }

    #[test]
    fn test_leading_dots_and_unsafe_characters_are_removed() {
        assert_eq!(secure_filename(".bashrc"), "bashrc");
        assert_eq!(secure_filename("photo<1>?.jpg"), "photo1.jpg");
        assert_eq!(secure_filename("__init__.py"), "init__.py");
    }

    #[test]
    fn test_windows_device_names_are_kept() {
        assert_eq!(secure_filename("CON.txt"), "CON.txt");
        assert_eq!(secure_filename("nul"), "nul");
    }

    #[test]
    fn test_may_sanitize_to_nothing() {
        assert_eq!(secure_filename("../.."), "");
        assert_eq!(secure_filename("..."), "");
        assert_eq!(secure_filename(""), "");
    }
}
