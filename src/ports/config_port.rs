//! Configuration access port.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// Keys present in `section`, empty if the section does not exist.
    fn keys(&self, section: &str) -> Vec<String>;
}
