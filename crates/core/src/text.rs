//! Small text helpers shared by labels and progress rendering

/// Turn `snake_case` into `Title Case`.
///
/// A cased character that follows an uncased one starts a new word, so
/// `"cost_research"` becomes `"Cost Research"`.
pub fn title_case(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut word_start = true;
    for ch in raw.replace('_', " ").chars() {
        if ch.is_alphabetic() {
            if word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            word_start = false;
        } else {
            out.push(ch);
            word_start = true;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("cost_research"), "Cost Research");
        assert_eq!(title_case("prosthetics"), "Prosthetics");
        assert_eq!(title_case("ORTHOTIC_devices"), "Orthotic Devices");
        assert_eq!(title_case(""), "");
    }
}
