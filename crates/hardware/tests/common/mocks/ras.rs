use mockall::mock;
use smtsim_core::core::units::ras::ReturnAddressStack;

mock! {
    pub ReturnStack {}
    impl ReturnAddressStack for ReturnStack {
        fn push(&mut self, addr: u64);
        fn pop(&mut self) -> u64;
        fn checkpoint(&self) -> usize;
        fn recover(&mut self, idx: usize);
    }
}
