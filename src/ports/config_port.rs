//! Configuration access port trait.

pub trait ConfigPort {
    /// Raw value of `key` in `section`; typing is left to the domain.
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn has_key(&self, section: &str, key: &str) -> bool {
        self.get_string(section, key).is_some()
    }
}
