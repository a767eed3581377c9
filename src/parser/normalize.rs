/// Canonical comparison form: control characters dropped, lower-cased,
/// whitespace runs (NBSP included) collapsed to one ASCII space, trimmed.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .chars()
        .filter(|c| !c.is_control() || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_and_folds() {
        assert_eq!(normalize("  Conteudo:\u{a0}\u{a0}DESPACHO\r\n\tVistos  "), "conteudo: despacho vistos");
    }

    #[test]
    fn strips_control_chars() {
        assert_eq!(normalize("Intima\u{0}ção\u{7f}"), "intimação");
    }

    #[test]
    fn empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize(" \u{a0}\n "), "");
    }

    #[test]
    fn idempotent() {
        for s in ["Publicação 1 de 2\n  PROCESSO", "ÁÉÍ  óú\u{a0}x", "", "a\u{1}b  C"] {
            let once = normalize(s);
            assert_eq!(normalize(&once), once);
            assert!(!once.contains("  "));
            assert!(!once.chars().any(char::is_uppercase));
        }
    }
}
