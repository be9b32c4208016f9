use std::convert::Infallible;

use beanbag::prelude::*;

pub struct Test1;

#[configuration]
impl Test1 {
    #[construct]
    pub fn new() -> Self {
        todo!()
    }
}

pub struct Test2;

#[configuration]
impl Test2 {
    #[construct]
    pub fn new() -> Test2 {
        todo!()
    }
}

pub struct Test3;

#[configuration]
impl Test3 {
    #[construct]
    pub fn new() -> Result<Self, Infallible> {
        todo!()
    }
}

pub struct Test4;

#[configuration]
impl Test4 {
    #[construct]
    pub fn new() -> Result<Test4, std::io::Error> {
        todo!()
    }
}

pub struct Test5;

#[configuration]
impl Test5 {
    #[construct]
    pub fn new() -> std::result::Result<Test5, String> {
        todo!()
    }
}

fn main() {}
