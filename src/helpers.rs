/// `mm:ss`, minutes uncapped.
pub fn format_seconds(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

pub trait CharEnds {
    fn first_char(&self) -> Option<char>;
    fn last_char(&self) -> Option<char>;
}

impl CharEnds for str {
    fn first_char(&self) -> Option<char> {
        self.chars().next()
    }

    fn last_char(&self) -> Option<char> {
        self.chars().next_back()
    }
}

pub fn digit_count(value: u32) -> usize {
    let mut digits = 1;
    let mut rest = value / 10;
    while rest > 0 {
        digits += 1;
        rest /= 10;
    }
    digits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(0), "00:00");
        assert_eq!(format_seconds(65), "01:05");
        assert_eq!(format_seconds(3600), "60:00");
    }

    #[test]
    fn test_char_ends_are_unicode_aware() {
        assert_eq!("사과".first_char(), Some('사'));
        assert_eq!("사과".last_char(), Some('과'));
        assert_eq!("".last_char(), None);
    }

    #[test]
    fn test_digit_count() {
        assert_eq!(digit_count(0), 1);
        assert_eq!(digit_count(9), 1);
        assert_eq!(digit_count(10), 2);
        assert_eq!(digit_count(144), 3);
    }
}
