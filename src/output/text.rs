use crate::error::AppResult;

pub fn print_block(text: &str) -> AppResult<()> {
    println!("{text}");
    Ok(())
}
