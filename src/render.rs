pub(crate) mod compositor;
pub(crate) mod frame;
pub(crate) mod preview;
