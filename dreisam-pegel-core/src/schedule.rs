use chrono::Timelike;

/// Hour for routine updates.
pub const ROUTINE_HOUR: u32 = 12;
/// Hours at which updates go out while a closure level is active.
pub const WARNING_HOURS: [u32; 4] = [0, 6, 12, 18];
/// Posts only go out in the first quarter of an hour.
pub const POST_WINDOW_MINUTES: u32 = 15;

/// Whether a run at `now` (local wall time) should post.
pub fn should_post<T: Timelike>(now: &T, is_warning: bool) -> bool {
    if now.minute() >= POST_WINDOW_MINUTES {
        return false;
    }
    if is_warning {
        WARNING_HOURS.contains(&now.hour())
    } else {
        now.hour() == ROUTINE_HOUR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn routine_posts_at_noon_only() {
        assert!(should_post(&at(12, 0), false));
        assert!(should_post(&at(12, 14), false));
        assert!(!should_post(&at(12, 15), false));
        assert!(!should_post(&at(6, 0), false));
        assert!(!should_post(&at(18, 5), false));
    }

    #[test]
    fn warnings_post_every_six_hours() {
        for hour in WARNING_HOURS {
            assert!(should_post(&at(hour, 0), true), "hour {hour}");
            assert!(!should_post(&at(hour, 30), true), "hour {hour}");
        }
        assert!(!should_post(&at(13, 0), true));
        assert!(!should_post(&at(23, 0), true));
    }
}
