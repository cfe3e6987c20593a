pub trait HandleStore {
    fn put_parameter(&self, name: &str, value: &str) -> Result<(), String>;
    fn get_parameter(&self, name: &str) -> Result<String, String>;
}
