pub(crate) mod tenant;
