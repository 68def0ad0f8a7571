mod spawn;

pub(crate) use spawn::*;
