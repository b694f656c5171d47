/// This file contains miscellaneous helper macros and functions

#[macro_export]
macro_rules! prompt {
    ($($arg:tt)*) => ({
        print!("\x1b[1;35m\u{2726}branchmap\u{2726}\x1b[0m ");
        println!($($arg)*);
    });
}

// Warnings go to stderr, the bitmap lives inside instrumented targets whose
// stdout we must not touch
#[macro_export]
macro_rules! prompt_warn {
    ($($arg:tt)*) => ({
        eprint!("\x1b[1;33m\u{2726}branchmap\u{2726}\x1b[0m ");
        eprintln!($($arg)*);
    });
}

#[macro_export]
macro_rules! fatal {
    ($err:expr) => {
        {
            eprint!("\n\x1b[1;31mfatal:\x1b[0m ");
            $err.display();
            std::process::exit(-1);
        }
    };
}

/// Parse an address that is either hex with a `0x` prefix or plain decimal
pub fn parse_addr(s: &str) -> Option<usize> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        usize::from_str_radix(hex, 16).ok()
    } else {
        s.parse::<usize>().ok()
    }
}

/// Turn a duration in seconds into the `Xd Xh Xm Xs` form used in reports
pub fn format_uptime(total_seconds: u64) -> String {
    let days = total_seconds / 86400;
    let hours = (total_seconds % 86400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_hex_and_decimal_addresses() {
        assert_eq!(parse_addr("0x401000"), Some(0x401000));
        assert_eq!(parse_addr("0XFF"), Some(0xff));
        assert_eq!(parse_addr(" 4096 "), Some(4096));
        assert_eq!(parse_addr("0xzz"), None);
        assert_eq!(parse_addr("-1"), None);
        assert_eq!(parse_addr(""), None);
    }

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(0), "0d 0h 0m 0s");
        assert_eq!(format_uptime(90_061), "1d 1h 1m 1s");
    }
}
