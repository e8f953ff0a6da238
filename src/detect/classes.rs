/// Human-readable label for a raw class token. Matching ignores case;
/// unknown tokens are returned unchanged.
pub fn readable_class_name(raw: &str) -> String {
    match raw.to_lowercase().as_str() {
        "b3" => "Sampah B3".to_string(),
        "anorganik" => "Sampah Anorganik".to_string(),
        "organik" => "Sampah Organik".to_string(),
        _ => raw.to_string(),
    }
}
