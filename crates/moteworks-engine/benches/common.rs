// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_comfort(stages: usize, moments: usize) -> String {
    let mut content = String::from(
        "Name: Benchmark Grove\nDescription: A quiet place to rest\nUnlocked Description: The grove opens up\n\n",
    );

    for stage in 0..stages {
        content.push_str(&format!("Stage: Part {stage} #st{stage}\n"));
        content.push_str("// pacing note\n");
        for moment in 0..moments {
            if moment % 3 == 0 {
                content.push_str(&format!(
                    "> The wind moves through the trees #m{stage}_{moment}\n"
                ));
            } else {
                content.push_str(&format!(
                    "Clue: Don't you hear it, friend? #m{stage}_{moment}\n"
                ));
            }
        }
        content.push('\n');
    }

    content
}
