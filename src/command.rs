#[derive(Debug, Clone)]
pub enum Command {
    /// New dropdown value; `None` when the selection was cleared.
    SelectMonth(Option<String>),
    Exit,
}
