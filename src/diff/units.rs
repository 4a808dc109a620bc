//! Human formatting of metric values.

use std::fmt;

/// How a tool's metric values should be displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Number,
    TimeMilliseconds,
    TimeCpuSeconds,
    FileSize,
}

impl OutputKind {
    /// Unit shown after the tool key in a delta report header
    pub fn unit_label(self) -> &'static str {
        match self {
            OutputKind::Number => "",
            OutputKind::TimeMilliseconds => "ms",
            OutputKind::TimeCpuSeconds => "CPU seconds",
            OutputKind::FileSize => "bytes",
        }
    }

    /// Format one value; zero always renders as `-`
    pub fn format_value(self, value: f64) -> String {
        if value == 0.0 {
            return "-".to_string();
        }
        match self {
            OutputKind::Number => format_number(value),
            OutputKind::TimeMilliseconds => {
                if value < 1000.0 {
                    format!("{}ms", format_number(value))
                } else {
                    format!("{:.2} sec", value / 1000.0)
                }
            }
            OutputKind::TimeCpuSeconds => format!("{value:.2} sec"),
            OutputKind::FileSize => format_file_size(value),
        }
    }
}

impl fmt::Display for OutputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputKind::Number => "number",
            OutputKind::TimeMilliseconds => "milliseconds",
            OutputKind::TimeCpuSeconds => "CPU seconds",
            OutputKind::FileSize => "file size",
        };
        f.write_str(name)
    }
}

/// Integral values print without a fractional part
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn format_file_size(bytes: f64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];

    if bytes.abs() < 1024.0 {
        return format!("{} bytes", format_number(bytes));
    }

    let mut scaled = bytes;
    let mut unit = UNITS[0];
    for candidate in UNITS {
        scaled /= 1024.0;
        unit = candidate;
        if scaled.abs() < 1024.0 {
            break;
        }
    }

    let magnitude = scaled.abs();
    if magnitude < 10.0 {
        format!("{scaled:.2} {unit}")
    } else if magnitude < 100.0 {
        format!("{scaled:.1} {unit}")
    } else {
        format!("{} {unit}", scaled.trunc() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_dash_for_every_kind() {
        for kind in [
            OutputKind::Number,
            OutputKind::TimeMilliseconds,
            OutputKind::TimeCpuSeconds,
            OutputKind::FileSize,
        ] {
            assert_eq!(kind.format_value(0.0), "-");
        }
    }

    #[test]
    fn test_number() {
        assert_eq!(OutputKind::Number.format_value(12.0), "12");
        assert_eq!(OutputKind::Number.format_value(12.5), "12.5");
    }

    #[test]
    fn test_milliseconds() {
        assert_eq!(OutputKind::TimeMilliseconds.format_value(850.0), "850ms");
        assert_eq!(OutputKind::TimeMilliseconds.format_value(1500.0), "1.50 sec");
    }

    #[test]
    fn test_cpu_seconds() {
        assert_eq!(OutputKind::TimeCpuSeconds.format_value(3.25), "3.25 sec");
    }

    #[test]
    fn test_file_size() {
        assert_eq!(OutputKind::FileSize.format_value(512.0), "512 bytes");
        assert_eq!(OutputKind::FileSize.format_value(1536.0), "1.50 KB");
        assert_eq!(OutputKind::FileSize.format_value(50.0 * 1024.0 * 1024.0), "50.0 MB");
        assert_eq!(OutputKind::FileSize.format_value(300.0 * 1024.0 * 1024.0 * 1024.0), "300 GB");
    }
}
