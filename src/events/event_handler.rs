pub trait EventHandler<T> {
    fn handle_event(&self, event: &T);
}
