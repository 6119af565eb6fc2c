fn main() {
    mantissa_engine::uci::run_uci_loop();
}
