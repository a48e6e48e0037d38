use leptos::prelude::*;

/// Holds a loading flag up for as long as the guard lives.
///
/// Async tasks take one before their first `.await`; every exit path (success,
/// error, early return) drops it and clears the flag.
pub(crate) struct BusyGuard {
    flag: RwSignal<bool>,
}

impl BusyGuard {
    pub fn new(flag: RwSignal<bool>) -> Self {
        flag.set(true);
        Self { flag }
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        // The owner may already be gone if the view unmounted mid-request.
        let _ = self.flag.try_set(false);
    }
}

/// Trimmed input, or `None` when nothing but whitespace was entered.
pub(crate) fn non_blank(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_guard_clears_on_drop() {
        let owner = Owner::new();
        owner.with(|| {
            let flag = RwSignal::new(false);
            {
                let _busy = BusyGuard::new(flag);
                assert!(flag.get_untracked());
            }
            assert!(!flag.get_untracked());
        });
    }

    #[test]
    fn test_busy_guard_clears_on_early_return() {
        fn work(flag: RwSignal<bool>, fail: bool) -> Result<(), String> {
            let _busy = BusyGuard::new(flag);
            if fail {
                return Err("boom".to_string());
            }
            Ok(())
        }

        let owner = Owner::new();
        owner.with(|| {
            let flag = RwSignal::new(false);
            assert!(work(flag, true).is_err());
            assert!(!flag.get_untracked());
            assert!(work(flag, false).is_ok());
            assert!(!flag.get_untracked());
        });
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank("  hi "), Some("hi"));
        assert_eq!(non_blank(" \n\t"), None);
    }
}
