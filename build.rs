fn main() {
    // Propagates the ESP-IDF build environment when the espidf feature is
    // active; emits nothing on host-target builds.
    if std::env::var_os("CARGO_FEATURE_ESPIDF").is_some() {
        embuild::espidf::sysenv::output();
    }
}
