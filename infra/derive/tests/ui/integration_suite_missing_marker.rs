use myproduct_derive::integration_suite;

#[integration_suite]
mod cases {
    async fn passes(_ctx: &()) -> Result<(), std::fmt::Error> {
        Ok(())
    }
}

fn main() {}
