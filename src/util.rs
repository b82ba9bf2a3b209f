/// Characters per word in the WPM convention.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Shortest elapsed time used for scoring, so a first keystroke cannot divide
/// by zero.
pub const MIN_ELAPSED_SECS: f64 = 0.001;

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}

/// Words per minute from correct characters, truncated toward zero.
pub fn wpm(correct_chars: usize, elapsed_secs: f64) -> u32 {
    let elapsed_secs = elapsed_secs.max(MIN_ELAPSED_SECS);
    let minutes = elapsed_secs / 60.0;
    ((correct_chars as f64 / CHARS_PER_WORD) / minutes) as u32
}

/// Percentage of typed characters that are correct, truncated; 100 when
/// nothing has been typed.
pub fn accuracy(correct_chars: usize, typed_chars: usize) -> u32 {
    if typed_chars == 0 {
        return 100;
    }
    ((correct_chars as f64 / typed_chars as f64) * 100.0) as u32
}

/// Number of positions where both sequences hold the same character.
pub fn matching_chars(target: &[char], input: &[char]) -> usize {
    target
        .iter()
        .zip(input.iter())
        .filter(|(expected, typed)| expected == typed)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[10., 20., 30., 15., 22.]), Some(19.4));
        assert_eq!(mean(&[15., 7., 55., 12., 4.]), Some(18.6));
    }

    #[test]
    fn test_mean_single_value() {
        assert_eq!(mean(&[42.0]), Some(42.0));
    }

    #[test]
    fn test_mean_empty_slice() {
        assert_eq!(mean(&[]), None);
    }

    #[test]
    fn test_wpm_one_minute() {
        assert_eq!(wpm(250, 60.0), 50);
    }

    #[test]
    fn test_wpm_truncates_partial_words() {
        // 2 chars in a minute is 0.4 words
        assert_eq!(wpm(2, 60.0), 0);
        assert_eq!(wpm(14, 60.0), 2);
    }

    #[test]
    fn test_wpm_half_minute() {
        assert_eq!(wpm(100, 30.0), 40);
    }

    #[test]
    fn test_wpm_floors_tiny_elapsed() {
        // 1 char in 0.001s is 12000 wpm, not infinity
        assert_eq!(wpm(1, 0.0), 12_000);
        assert_eq!(wpm(0, 0.0), 0);
    }

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(3, 4), 75);
        assert_eq!(accuracy(2, 3), 66);
        assert_eq!(accuracy(5, 5), 100);
        assert_eq!(accuracy(0, 5), 0);
    }

    #[test]
    fn test_accuracy_empty_input() {
        assert_eq!(accuracy(0, 0), 100);
    }

    #[test]
    fn test_matching_chars() {
        let target: Vec<char> = "hello".chars().collect();
        assert_eq!(matching_chars(&target, &"hexlo".chars().collect::<Vec<_>>()), 4);
        assert_eq!(matching_chars(&target, &"he".chars().collect::<Vec<_>>()), 2);
        assert_eq!(matching_chars(&target, &[]), 0);
    }
}
