// Usage: arcstd <oracle|transitions|parse> ...

fn main() {
    arcstd::cli::run();
}
