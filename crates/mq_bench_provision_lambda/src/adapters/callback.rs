pub trait CallbackChannel {
    fn put(&self, url: &str, body: &[u8]) -> Result<(), String>;
}
