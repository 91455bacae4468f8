/// Generates a transfer id for a new payout batch.
///
/// The id is stored on the batch before the transfer is attempted, so a crashed run can query
/// the gateway for the same id later. Gateways restrict transfer ids to alphanumerics and
/// underscores, so the restaurant id is sanitised.
pub fn new_transfer_id(restaurant_id: &str) -> String {
    let tag = restaurant_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect::<String>();
    format!("pb_{tag}_{:016x}", rand::random::<u64>())
}
