/// Whatever presents the tipping screen. The session only ever asks it to go
/// away.
pub trait ScreenHost: Send + Sync {
    fn dismiss(&self);
}
