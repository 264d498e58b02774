use alloy_sol_types::sol;

sol!{
    /// Airdrop-style distributor with a caller-gated one-time claim.
    interface IClaimable  {
        function claim() external;
    }
}
