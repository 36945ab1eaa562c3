#[derive(Debug, Clone, PartialEq)]
pub enum FormCommand {
    NextTab,
    PrevTab,
    SetText {
        field: String,
        value: String,
    },
    SetBool {
        field: String,
        value: bool,
    },
    CycleChoice {
        field: String,
        delta: i32,
    },
    AddItem {
        collection: String,
    },
    UpdateItem {
        collection: String,
        index: usize,
        field: String,
        value: String,
    },
    RemoveItem {
        collection: String,
        index: usize,
    },
}
