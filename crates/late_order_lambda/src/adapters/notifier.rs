pub trait LateOrderNotifier {
    fn publish(&self, subject: &str, message: &str) -> Result<(), String>;
}
