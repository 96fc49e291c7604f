// implemented by anything holding scheduled callbacks that must not outlive its owner;
// destroy() cancels them synchronously and is safe to call more than once
pub trait Destroyable {
    fn destroy(&mut self);
}
