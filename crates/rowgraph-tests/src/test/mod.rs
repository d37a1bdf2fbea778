mod category;
