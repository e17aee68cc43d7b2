use myproduct_derive::integration_suite;

#[integration_suite(Marker)]
mod cases {
    pub fn helper() {}
}

fn main() {}
