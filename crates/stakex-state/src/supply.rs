/// Read-only totals used to check coin conservation.
///
/// Sums are `u128` so adding up many `u64` amounts can't overflow.
pub trait SupplyView {
    fn total_balances(&self) -> u128;

    fn total_stakes(&self) -> u128;

    fn total_collected_fees(&self) -> u128;

    /// Balances + stakes + collected fees. Constant across any sequence of
    /// applied transactions.
    fn total_coin(&self) -> u128 {
        self.total_balances() + self.total_stakes() + self.total_collected_fees()
    }
}
