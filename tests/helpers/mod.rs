// 各测试二进制只用到部分辅助函数
#![allow(dead_code)]

pub mod api_test_helper;
pub mod test_data_builder;
