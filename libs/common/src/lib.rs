pub mod interfaces {
    pub mod claimable;
    pub mod erc20;
}
