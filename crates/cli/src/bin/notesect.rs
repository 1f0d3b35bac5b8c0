use anyhow::Result;

fn main() -> Result<()> {
    note_section_cli::main_entry()
}
