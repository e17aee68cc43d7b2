use myproduct_derive::integration_suite;

#[integration_suite(Marker)]
mod cases {
    async fn two_contexts(_a: &(), _b: &()) {}
}

fn main() {}
