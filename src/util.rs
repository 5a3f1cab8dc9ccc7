//! Small utility helpers used across modules.

/// Normalize a free-text label for comparison: trim, lowercase and collapse
/// inner whitespace, so "Escape " and "escape" compare equal.
pub fn normalize_label(s: &str) -> String {
  s.split_whitespace()
    .map(|w| w.to_lowercase())
    .collect::<Vec<_>>()
    .join(" ")
}

/// True for identifiers usable as a storage key or URL segment: non-empty,
/// at most 64 chars, ASCII alphanumerics plus `-` and `_`.
pub fn is_safe_key(s: &str) -> bool {
  !s.is_empty()
    && s.len() <= 64
    && s.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with whole rewrite submissions.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn normalize_label_ignores_case_and_spacing() {
    assert_eq!(normalize_label("  Escape  Demand "), "escape demand");
    assert_eq!(normalize_label("ATTENTION"), normalize_label("attention"));
  }

  #[test]
  fn safe_keys() {
    assert!(is_safe_key("onboarding-checklist_2"));
    assert!(!is_safe_key(""));
    assert!(!is_safe_key("../etc/passwd"));
    assert!(!is_safe_key("has space"));
    assert!(!is_safe_key(&"a".repeat(65)));
  }

  #[test]
  fn truncation_respects_char_boundaries() {
    let s = "ñañañaña";
    let out = trunc_for_log(s, 3);
    assert!(out.starts_with("ñ"));
    assert!(out.ends_with("bytes total)"));
    assert_eq!(trunc_for_log("short", 10), "short");
  }
}
