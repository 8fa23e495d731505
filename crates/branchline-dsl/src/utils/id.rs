use uuid::Uuid;

/// Length of generated node ids
pub const NODE_ID_LEN: usize = 5;

/// Length of the random suffix on generated dialogue and character ids
const LONG_SUFFIX_LEN: usize = 8;

fn random_hex(len: usize) -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(len);
    token
}

/// Generate a short random node id (5 lowercase hex characters)
pub fn generate_node_id() -> String {
    random_hex(NODE_ID_LEN)
}

/// Generate a dialogue id such as "dialogue_3f9a0c12"
pub fn generate_dialogue_id() -> String {
    format!("dialogue_{}", random_hex(LONG_SUFFIX_LEN))
}

/// Generate a character id such as "char_3f9a0c12"
pub fn generate_character_id() -> String {
    format!("char_{}", random_hex(LONG_SUFFIX_LEN))
}
