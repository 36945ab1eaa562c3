/// Linear cursor over a form's ordered tabs. No wrap-around at either end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabCursor {
    tabs: Vec<String>,
    active: usize,
}

impl TabCursor {
    pub fn new(tabs: Vec<String>) -> Self {
        Self { tabs, active: 0 }
    }

    pub fn tabs(&self) -> &[String] {
        &self.tabs
    }

    pub fn active(&self) -> &str {
        self.tabs.get(self.active).map(String::as_str).unwrap_or("")
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn has_next(&self) -> bool {
        self.active + 1 < self.tabs.len()
    }

    pub fn has_previous(&self) -> bool {
        self.active > 0
    }

    pub fn advance(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        self.active += 1;
        true
    }

    pub fn retreat(&mut self) -> bool {
        if !self.has_previous() {
            return false;
        }
        self.active -= 1;
        true
    }

    pub fn focus(&mut self, tab: &str) -> bool {
        match self.tabs.iter().position(|candidate| candidate == tab) {
            Some(index) => {
                self.active = index;
                true
            }
            None => false,
        }
    }

    pub fn reset(&mut self) {
        self.active = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cursor() -> TabCursor {
        TabCursor::new(vec!["basic".into(), "content".into(), "media".into()])
    }

    #[test]
    fn boundaries_do_not_wrap() {
        let mut tabs = cursor();
        assert!(!tabs.has_previous());
        assert!(!tabs.retreat());
        assert_eq!(tabs.active(), "basic");
        assert!(tabs.advance());
        assert!(tabs.advance());
        assert_eq!(tabs.active(), "media");
        assert!(!tabs.has_next());
        assert!(!tabs.advance());
        assert_eq!(tabs.active(), "media");
        assert!(tabs.retreat());
        assert_eq!(tabs.active(), "content");
    }

    #[test]
    fn focus_and_reset() {
        let mut tabs = cursor();
        assert!(tabs.focus("media"));
        assert_eq!(tabs.active_index(), 2);
        assert!(!tabs.focus("missing"));
        assert_eq!(tabs.active(), "media");
        tabs.reset();
        assert_eq!(tabs.active(), "basic");
    }
}
